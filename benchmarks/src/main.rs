use anyhow::anyhow;
use clap::Parser;
use const_format::concatcp;
use rand::seq::SliceRandom;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::process::{self, Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const LOCAL_PORT: u32 = 8374;
const LOCAL_URL: &str = concatcp!("http://127.0.0.1:", LOCAL_PORT);

#[rustfmt::skip]
const ROCKET_ENV: &[(&str, &str)] = &[
    ("ROCKET_PORT", concatcp!(LOCAL_PORT)),
    ("ROCKET_STORE", "memory"),
    ("ROCKET_SEED_FIXTURES", "false"),
];

#[rustfmt::skip]
const CANDIDATES: &[&str] = &[
    "Alice",
    "Bob",
    "Carol",
    "Dave",
    "Eve",
];

#[derive(Parser)]
struct Args {
    /// Silence local server logging.
    #[arg(short, long)]
    quiet: bool,

    /// Send local server logging to this file; takes precedence over --quiet.
    #[arg(long)]
    logfile: Option<String>,

    /// Connect to a remote server at this URL instead of running a local one.
    #[arg(long)]
    remote: Option<String>,

    /// How many threads to use. Defaults to the number of logical CPUs.
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    /// How many votes each thread casts.
    #[arg(long, default_value_t = 100)]
    votes: usize,
}

/// Construct a URL from segments.
macro_rules! url {
    ($base:expr, $($segment:expr),+) => {
        [$base, $($segment),+].join("/")
    };
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Outcome {
    Success {
        #[allow(dead_code)]
        success: bool,
    },
    Failure {
        error: String,
    },
}

#[derive(Debug, Deserialize)]
struct Listed {
    id: String,
    name: String,
    votes: u64,
}

#[derive(Debug, Deserialize)]
struct CandidateList {
    candidates: Vec<Listed>,
}

/// Build the optimised server binary.
fn setup_deps() -> anyhow::Result<()> {
    Command::new("cargo")
        .args(["build", "--release", "--bin", "vote-backend"])
        .status()?
        .success()
        .then_some(())
        .ok_or_else(|| anyhow!("server build exited nonzero"))
}

/// Terminate the given child process. This is a SIGTERM on unix and a hard-kill on other
/// platforms.
fn terminate_child(child: &mut Child) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let pid = nix::unistd::Pid::from_raw(child.id() as i32);
        nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM)?;
    }
    #[cfg(not(unix))]
    {
        child.kill()?;
    }
    Ok(())
}

/// Start a local server backed by the in-memory store and wait until it answers.
fn launch_server(logfile: Stdio) -> anyhow::Result<Child> {
    let mut proc = Command::new("./target/release/vote-backend")
        .envs(ROCKET_ENV.iter().copied())
        .stdout(logfile)
        .spawn()?;

    let client = Client::new();
    loop {
        let resp = client
            .get(url!(LOCAL_URL, "api/candidates/revision"))
            .send()
            .and_then(Response::error_for_status);
        if resp.is_ok() {
            break;
        }

        // Check the server didn't exit.
        if let Some(retcode) = proc.try_wait()? {
            return Err(anyhow!("Server exited prematurely with code {}", retcode));
        }
        thread::sleep(Duration::from_millis(50));
    }

    Ok(proc)
}

/// POST a form action and turn an `{"error": ...}` envelope into an error.
fn post_action(
    client: &Client,
    url: &str,
    action: &str,
    form: &[(&str, &str)],
) -> anyhow::Result<()> {
    let outcome: Outcome = client
        .post(url!(url, "actions/candidates", action))
        .form(form)
        .send()
        .and_then(Response::error_for_status)?
        .json()?;
    match outcome {
        Outcome::Success { .. } => Ok(()),
        Outcome::Failure { error } => Err(anyhow!("{action} failed: {error}")),
    }
}

fn fetch_candidates(client: &Client, url: &str) -> anyhow::Result<Vec<Listed>> {
    let list: CandidateList = client
        .get(url!(url, "api/candidates"))
        .send()
        .and_then(Response::error_for_status)?
        .json()?;
    Ok(list.candidates)
}

/// Add the benchmark candidates and return their IDs with their starting tallies.
fn setup_candidates(client: &Client, url: &str) -> anyhow::Result<HashMap<String, u64>> {
    let run_tag = rand::random::<u16>();
    let names: Vec<String> = CANDIDATES
        .iter()
        .map(|name| format!("{name} #{run_tag}"))
        .collect();

    for name in &names {
        post_action(
            client,
            url,
            "add",
            &[("name", name.as_str()), ("description", "Benchmark candidate")],
        )?;
    }

    let tallies: HashMap<_, _> = fetch_candidates(client, url)?
        .into_iter()
        .filter(|c| names.contains(&c.name))
        .map(|c| (c.id, c.votes))
        .collect();
    if tallies.len() != names.len() {
        return Err(anyhow!(
            "expected {} benchmark candidates, found {}",
            names.len(),
            tallies.len()
        ));
    }
    Ok(tallies)
}

/// Cast votes from `num_threads` threads and return how many each candidate received.
fn benchmark(
    url: &str,
    ids: &[String],
    num_threads: usize,
    votes_per_thread: usize,
) -> anyhow::Result<HashMap<String, u64>> {
    let total_votes = num_threads * votes_per_thread;

    let start = Instant::now();
    let (cast, vote_duration) = thread::scope(|s| {
        let mut threads = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let t = s.spawn(move || {
                let client = Client::new();
                let mut cast: HashMap<String, u64> = HashMap::new();
                let mut duration = Duration::ZERO;

                for _ in 0..votes_per_thread {
                    let id = ids
                        .choose(&mut rand::thread_rng())
                        .ok_or_else(|| anyhow!("no candidates to vote for"))?;
                    let pre_vote = Instant::now();
                    post_action(&client, url, "vote", &[("id", id.as_str())])?;
                    duration += pre_vote.elapsed();
                    *cast.entry(id.clone()).or_default() += 1;
                }

                Ok::<_, anyhow::Error>((cast, duration))
            });
            threads.push(t);
        }

        let mut cast: HashMap<String, u64> = HashMap::new();
        let mut duration = Duration::ZERO;
        for t in threads {
            let (thread_cast, thread_duration) = t.join().expect("thread panicked")?;
            for (id, n) in thread_cast {
                *cast.entry(id).or_default() += n;
            }
            duration += thread_duration;
        }
        Ok::<_, anyhow::Error>((cast, duration))
    })?;
    let total_duration = start.elapsed();

    let avg_vote_duration = vote_duration / total_votes.max(1) as u32;
    // Theoretical votes per sec is 1/avg_duration * num_threads.
    let votes_per_sec = num_threads as f64 / avg_vote_duration.as_secs_f64();
    // Actual votes per sec is total_votes / total_time.
    let actual_votes_per_sec = total_votes as f64 / total_duration.as_secs_f64();

    println!("vote: {:?} ({:.2}/s)", avg_vote_duration, votes_per_sec);
    println!(
        "actual duration: {} votes in {:?} ({:.2}/s)",
        total_votes, total_duration, actual_votes_per_sec
    );

    Ok(cast)
}

/// Return `Ok(())` if every vote cast shows up in the server's tallies.
fn verify(
    client: &Client,
    url: &str,
    before: &HashMap<String, u64>,
    cast: &HashMap<String, u64>,
) -> anyhow::Result<()> {
    let after: HashMap<_, _> = fetch_candidates(client, url)?
        .into_iter()
        .map(|c| (c.id, c.votes))
        .collect();

    let mut lost = 0;
    for (id, start) in before {
        let expected = start + cast.get(id).copied().unwrap_or(0);
        let actual = after
            .get(id)
            .copied()
            .ok_or_else(|| anyhow!("candidate {id} vanished during the run"))?;
        if actual != expected {
            println!("{id}: expected {expected} votes, found {actual}");
            lost += expected.abs_diff(actual);
        }
    }

    if lost == 0 {
        println!("verified: all {} votes counted", cast.values().sum::<u64>());
        Ok(())
    } else {
        Err(anyhow!("{lost} votes were lost or double-counted"))
    }
}

/// Remove the benchmark candidates again.
fn cleanup(client: &Client, url: &str, ids: &[String]) -> anyhow::Result<()> {
    for id in ids {
        post_action(client, url, "delete", &[("id", id.as_str())])?;
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let url = args.remote.as_deref().unwrap_or(LOCAL_URL);

    // If we're not connecting remotely, bring up a local server.
    let mut proc: Option<Child> = None;
    if args.remote.is_none() {
        setup_deps()?;
        let logfile = match args.logfile {
            Some(path) => Stdio::from(File::create(path)?),
            None => {
                if args.quiet {
                    Stdio::null()
                } else {
                    Stdio::inherit()
                }
            }
        };
        proc = Some(launch_server(logfile)?);
    }

    // Use a closure to ensure the cleanup below runs.
    let result = (|| {
        let client = Client::new();
        let before = setup_candidates(&client, url)?;
        let ids: Vec<String> = before.keys().cloned().collect();

        let outcome = benchmark(url, &ids, args.threads, args.votes)
            .and_then(|cast| verify(&client, url, &before, &cast));
        cleanup(&client, url, &ids)?;
        outcome
    })();

    // Kill the server.
    if let Some(p) = proc.as_mut() {
        terminate_child(p)?;
        p.wait()?;
    }

    result
}

fn main() {
    if let Err(e) = run() {
        eprintln!("FATAL: {}", e);
        process::exit(1);
    }
}
