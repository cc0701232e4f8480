use std::env;
use std::process;

use anyhow::Result;
use clap::Parser;

use kernel_bump::git::{Git2Repository, Repository};
use kernel_bump::guard::{self, BranchGuard};
use kernel_bump::orchestrator::{self, BumpContext};
use kernel_bump::version::{self, KernelVersion, PairOrder};
use kernel_bump::{bootstrap, config, ui};

#[derive(clap::Parser)]
#[command(
    name = "kernel-bump",
    about = "Migrate version-named kernel files to a new upstream version, keeping both version lines traceable"
)]
struct Args {
    #[arg(
        short = 'c',
        long = "config-only",
        help = "Only migrate configuration files"
    )]
    config_only: bool,

    #[arg(short = 'p', long, help = "Descriptive platform name")]
    platform: Option<String>,

    #[arg(short = 's', long, help = "Source kernel version (e.g. 6.1.21)")]
    source: Option<String>,

    #[arg(short = 't', long, help = "Target kernel version (e.g. 6.1.26)")]
    target: Option<String>,

    #[arg(long, help = "Custom configuration file path")]
    config: Option<String>,
}

fn main() -> Result<()> {
    // Usage errors exit 1; -h/--help exits 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e)
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            e.print()?;
            return Ok(());
        }
        Err(e) => {
            e.print()?;
            process::exit(1);
        }
    };

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("cannot load configuration: {}", e));
            process::exit(1);
        }
    };

    let repo = match Git2Repository::open(".") {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("not a usable git repository: {}", e));
            process::exit(1);
        }
    };

    if let Err(e) = guard::ensure_kernel_root(repo.workdir()) {
        ui::display_error(&e.to_string());
        process::exit(1);
    }

    // Remote bootstrap is best-effort: a failure must not block the bump
    match bootstrap::run_first_time_setup(&repo, &config) {
        Ok(true) => ui::display_notice("first run: repository setup finished"),
        Ok(false) => {}
        Err(e) => ui::display_warning(&format!("first-run setup failed: {}", e)),
    }

    if let Err(e) = guard::ensure_clean(&repo) {
        ui::display_error(&e.to_string());
        process::exit(1);
    }

    let source = match resolve_version(args.source, "SOURCE_VERSION", "source", &repo) {
        Ok(v) => v,
        Err(e) => {
            ui::display_error(&e.to_string());
            process::exit(1);
        }
    };
    let target = match resolve_version(args.target, "TARGET_VERSION", "target", &repo) {
        Ok(v) => v,
        Err(e) => {
            ui::display_error(&e.to_string());
            process::exit(1);
        }
    };

    match version::validate_pair(&source, &target) {
        Ok(PairOrder::Upgrade) => {}
        Ok(PairOrder::Downgrade) => {
            ui::display_warning(&format!(
                "target version {} sorts before source version {}",
                target, source
            ));
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            process::exit(1);
        }
    }

    let platform = args
        .platform
        .or_else(|| env::var("PLATFORM_NAME").ok().filter(|s| !s.is_empty()))
        .or_else(|| config.platform.clone());

    let ctx = BumpContext {
        source,
        target,
        platform,
        config_only: args.config_only,
    };

    // The guard's scope brackets the whole orchestration: whatever
    // happens inside, we end up back on the starting branch.
    let outcome = {
        let run_guard = match BranchGuard::acquire(&repo) {
            Ok(g) => g,
            Err(e) => {
                ui::display_error(&e.to_string());
                process::exit(1);
            }
        };

        let head = run_guard.original_head().to_string();
        match &ctx.platform {
            Some(platform) => ui::display_notice(&format!(
                "bumping {} -> {} for {} on branch '{}' (from {})",
                ctx.source,
                ctx.target,
                platform,
                run_guard.original_branch(),
                &head[..7]
            )),
            None => ui::display_notice(&format!(
                "bumping {} -> {} on branch '{}' (from {})",
                ctx.source,
                ctx.target,
                run_guard.original_branch(),
                &head[..7]
            )),
        }

        orchestrator::run(&repo, &ctx)
    };

    match outcome {
        Ok(outcome) => {
            for (from, to) in &outcome.moved {
                println!("  {} -> {}", from.display(), to.display());
            }
            ui::display_notice(&format!(
                "moved {} file(s); branch tip is now the restore commit {}",
                outcome.moved.len(),
                &outcome.restore_commit.to_string()[..7]
            ));
            Ok(())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            process::exit(1);
        }
    }
}

/// Resolve a version from flag, then environment, then an interactive
/// prompt listing the known version tags.
fn resolve_version(
    flag: Option<String>,
    env_key: &str,
    label: &str,
    repo: &Git2Repository,
) -> Result<KernelVersion> {
    let raw = flag.or_else(|| env::var(env_key).ok().filter(|s| !s.is_empty()));

    let raw = match raw {
        Some(raw) => raw,
        None => {
            let tags = version::sort_version_tags(&repo.list_tags()?);
            ui::prompt_version(label, &tags)?
        }
    };

    Ok(KernelVersion::parse(&raw)?)
}
