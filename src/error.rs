/// Broad failure category, used by callers (and tests) that need to branch on
/// what went wrong rather than on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Dataset file missing, unreadable, or without usable rows.
    DataLoad,
    /// Invalid CLI/config value.
    Config,
    /// A page name was registered twice.
    DuplicateName,
    /// A page name was requested that nobody registered.
    UnknownPage,
    /// Terminal setup, event or draw failure.
    Terminal,
    /// Failed to write an export file.
    Export,
}

impl ErrorKind {
    fn default_exit_code(self) -> u8 {
        match self {
            ErrorKind::DataLoad | ErrorKind::Config => 2,
            ErrorKind::DuplicateName | ErrorKind::UnknownPage => 3,
            ErrorKind::Terminal => 4,
            ErrorKind::Export => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.default_exit_code(),
            message: message.into(),
        }
    }

    pub fn data_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataLoad, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
