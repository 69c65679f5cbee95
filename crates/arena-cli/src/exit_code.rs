/// Process exit codes per the CLI's documented contract: `0` everything
/// succeeded (and, under `--ci`, every hard assertion passed too); `1` a
/// run errored or a hard assertion failed under `--ci`; `2` a
/// configuration/usage error happened before any run was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    RunFailure = 1,
    UsageError = 2,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
