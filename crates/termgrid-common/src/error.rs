use thiserror::Error;

#[derive(Error, Debug)]
pub enum TermGridError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PTY error: {0}")]
    Pty(String),

    #[error("resize rejected: rows and columns must both be >= 1 (got {rows}x{cols})")]
    ResizeTooSmall { rows: u16, cols: u16 },
}

pub type Result<T> = std::result::Result<T, TermGridError>;
