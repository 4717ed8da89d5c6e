//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, which answers the two
//! questions the build driver asks for a path: is it built in this
//! environment, and is the built artifact run as a test.
//!
//! ## Functionality
//!
//! - **Verdicts**: Prints `build` and `test` verdicts for the given path.
//! - **Explanations**: With `--explain`, lists every rule that excluded it.
//! - **Expected outcome**: Shows the exit status or signal a test run must end
//!   with.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

use path_properties::eligibility::{build_exclusions, test_exclusions, Exclusion};
use path_properties::env::Environment;
use path_properties::output::OutputConfig;
use path_properties::resolve::ResolvedProperties;
use path_properties::tree::PropertyTree;

use super::EnvArgs;

/// Decide whether a path is built and tested
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path relative to the root of the source tree, e.g. userland/c/exit1.c
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub env: EnvArgs,

    /// Require the path to produce a linkable executable.
    #[arg(long)]
    pub link: bool,

    /// List every rule that excludes the path.
    #[arg(long)]
    pub explain: bool,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, tree: &PropertyTree, color_flag: &str) -> Result<()> {
    let env = args.env.environment()?;
    let resolved = tree.resolve(&args.path);
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, &resolved, &env, args.link, args.explain, &out)
}

fn write_report<W: Write>(
    w: &mut W,
    resolved: &ResolvedProperties,
    env: &Environment,
    link: bool,
    explain: bool,
    out: &OutputConfig,
) -> Result<()> {
    let build = build_exclusions(resolved, env, link);
    let test = test_exclusions(resolved, env);

    writeln!(
        w,
        "{} ({} {} {})",
        resolved.path().join("/"),
        env.arch,
        env.mode,
        env.emulator
    )?;
    writeln!(w, "  build: {}", out.verdict(build.is_empty()))?;
    if explain {
        write_exclusions(w, &build)?;
    }
    writeln!(w, "  test:  {}", out.verdict(test.is_empty()))?;
    if explain {
        // build reasons were already listed above
        let test_only: Vec<Exclusion> = test.into_iter().filter(|e| !build.contains(e)).collect();
        write_exclusions(w, &test_only)?;
    }

    let expected = resolved.expected_outcome();
    match expected.signal {
        Some(signal) => writeln!(w, "  expect: signal {signal}")?,
        None => writeln!(w, "  expect: exit status {}", expected.exit_status)?,
    }
    Ok(())
}

fn write_exclusions<W: Write>(w: &mut W, exclusions: &[Exclusion]) -> io::Result<()> {
    for exclusion in exclusions {
        writeln!(w, "    - {exclusion}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_properties::env::{BuildMode, Emulator};

    fn tree() -> PropertyTree {
        PropertyTree::from_yaml_str(
            r#"
children:
  userland:
    properties: { userland: true }
    children:
      c:
        children:
          abort.c: { signal_received: SIGABRT }
          sleep.c: { more_than_1s: true }
"#,
        )
        .unwrap()
    }

    fn report(path: &str, env: &Environment, explain: bool) -> String {
        let resolved = tree().resolve(path);
        let mut buf = Vec::new();
        write_report(&mut buf, &resolved, env, false, explain, &OutputConfig::without_color())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_buildable_and_testable() {
        let env = Environment::default();
        let text = report("userland/c/abort.c", &env, false);
        assert!(text.starts_with("userland/c/abort.c (x86_64 userland qemu)\n"));
        assert!(text.contains("  build: yes\n"));
        assert!(text.contains("  test:  yes\n"));
        assert!(text.contains("  expect: signal SIGABRT\n"));
    }

    #[test]
    fn test_explain_lists_test_only_reasons() {
        let env = Environment::default();
        let text = report("userland/c/sleep.c", &env, true);
        assert!(text.contains("  test:  no\n    - more_than_1s is set\n"));
        assert!(text.contains("  expect: exit status 0\n"));
    }

    #[test]
    fn test_explain_lists_build_reasons_once() {
        let env = Environment::new("x86_64", BuildMode::Baremetal, Emulator::Gem5);
        let text = report("userland/c/abort.c", &env, true);
        assert_eq!(text.matches("not buildable in baremetal mode").count(), 1);
        assert!(text.contains("gem5 does not report signals"));
    }

    #[test]
    fn test_without_explain_prints_no_reasons() {
        let text = report("userland/c/sleep.c", &Environment::default(), false);
        assert!(!text.contains("    - "));
    }
}
