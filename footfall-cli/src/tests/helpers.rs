//! Test helpers for temporary workspaces and captured command output.

use std::cell::RefCell;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use super::*;

/// Temporary directory plus the argv and output of one CLI invocation.
#[derive(Debug)]
pub(super) struct CommandWorld {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) args: RefCell<Vec<String>>,
    pub(super) stdout: RefCell<Vec<u8>>,
    pub(super) result: RefCell<Option<Result<(), CliError>>>,
}

impl CommandWorld {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            _tmp: tmp,
            root,
            args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    pub(super) fn push_flag(&self, flag: &str, value: Option<&str>) {
        let mut args = self.args.borrow_mut();
        args.push(format!("--{flag}"));
        if let Some(text) = value {
            args.push(text.to_owned());
        }
    }

    /// Parse `subcommand` plus the recorded flags and run it into `stdout`.
    pub(super) fn run(&self, subcommand: &str) {
        let mut argv = vec!["footfall".to_owned(), subcommand.to_owned()];
        argv.extend(self.args.borrow().iter().cloned());
        let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
        let mut buffer = self.stdout.borrow_mut();
        let outcome = parsed.and_then(|cli| match cli.command {
            Command::Analyse(args) => analyse::run_analyse(args, &mut *buffer),
            Command::SampleBins(args) => sample::run_sample_bins(args, &mut *buffer),
        });
        self.result.replace(Some(outcome));
    }

    pub(super) fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }

    /// The recorded error, panicking if the command succeeded.
    pub(super) fn with_error(&self, check: impl FnOnce(&CliError)) {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error);
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}
