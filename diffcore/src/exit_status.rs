use std::process::{ExitCode, Termination};

pub const EXIT_STATUS_NO_DIFFERENCE: u8 = 0;
pub const EXIT_STATUS_DIFFERENCE: u8 = 1;
pub const EXIT_STATUS_TROUBLE: u8 = 2;

/// POSIX diff exit status: 0 when the files match (or differ only in
/// ignorable ways), 1 when differences were printed, 2 on trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffExitStatus {
    NotDifferent,
    Different,
    Trouble,
}

impl DiffExitStatus {
    pub fn status_code(&self) -> u8 {
        match self {
            DiffExitStatus::NotDifferent => EXIT_STATUS_NO_DIFFERENCE,
            DiffExitStatus::Different => EXIT_STATUS_DIFFERENCE,
            DiffExitStatus::Trouble => EXIT_STATUS_TROUBLE,
        }
    }
}

impl Termination for DiffExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self.status_code())
    }
}
