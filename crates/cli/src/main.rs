mod args;
mod github;
mod json;
mod logging;
mod text;

use anyhow::Context;
use clap::Parser;
use repo_diff_match_core::{ContentFetcher, FileLister, LocalCheckouts};

use crate::args::{Cli, Command, CompareArgs};
use crate::github::{GitHubClient, GitHubConfig};
use crate::json::{JsonCompareStats, map_report, write_json};
use crate::text::{format_compare_stats, format_text_report, has_skips};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match &cli.command {
        Command::Compare(args) => run_compare(args),
    };
    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run_compare(args: &CompareArgs) -> anyhow::Result<i32> {
    match &args.local {
        Some(root) => {
            let checkouts = LocalCheckouts::new(root).respect_gitignore(!args.no_gitignore);
            run(args, &checkouts)
        }
        None => {
            let client = GitHubClient::new(GitHubConfig {
                api_url: args.api_url.clone(),
                branch: args.branch.clone(),
                ..GitHubConfig::default()
            });
            run(args, &client)
        }
    }
}

fn run<S>(args: &CompareArgs, source: &S) -> anyhow::Result<i32>
where
    S: FileLister + ContentFetcher + Sync,
{
    let options = args.compare_options();
    let need_stats = args.stats || args.strict;

    let (report, compare_stats) = if need_stats {
        let outcome = repo_diff_match_core::compare_repositories_with_stats(
            &args.repo_a,
            &args.repo_b,
            source,
            source,
            &options,
        )
        .context("comparison failed")?;
        (outcome.result, Some(outcome.stats))
    } else {
        let report = repo_diff_match_core::compare_repositories(
            &args.repo_a,
            &args.repo_b,
            source,
            source,
            &options,
        )
        .context("comparison failed")?;
        (report, None)
    };
    let report = map_report(args.repo_a.to_string(), args.repo_b.to_string(), report);

    if args.json {
        if args.stats {
            write_json(&serde_json::json!({
                "report": report,
                "compareStats": compare_stats.as_ref().map(JsonCompareStats::from),
            }))?;
        } else {
            write_json(&report)?;
        }
    } else {
        print!("{}", format_text_report(&report));
    }

    if let Some(stats) = compare_stats {
        if args.stats && !args.json {
            eprint!("{}", format_compare_stats(&stats));
        }
        if args.strict && has_skips(&stats) {
            if !args.stats {
                eprint!("{}", format_compare_stats(&stats));
            }
            return Ok(1);
        }
    }

    Ok(0)
}
