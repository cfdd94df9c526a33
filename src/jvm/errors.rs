use std::fmt;

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),

    /// Name is not a legal class or member name
    MalformedName(String),

    /// Descriptor string could not be parsed
    MalformedDescriptor(String),

    /// A line of a hierarchy listing could not be understood
    MalformedListing { line: usize, message: String },

    /// The shadow model was asked about a class it does not know
    MissingClass(String),

    /// A class was declared twice in the same shadow model
    DuplicateClass(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "I/O error: {}", err),
            Error::MalformedName(msg) => f.write_str(msg),
            Error::MalformedDescriptor(msg) => write!(f, "Malformed descriptor: {}", msg),
            Error::MalformedListing { line, message } => {
                write!(f, "Malformed hierarchy listing (line {}): {}", line, message)
            }
            Error::MissingClass(name) => write!(f, "Class {} is not in the class graph", name),
            Error::DuplicateClass(name) => write!(f, "Class {} is declared twice", name),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}
