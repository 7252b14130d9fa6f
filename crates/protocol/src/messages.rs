//! Method and signal names of the channel and its exposed objects.

/// Object name the host registers its file-system handler under.
pub const FILE_SYSTEM_HANDLER: &str = "fileSystemHandler";
/// Object name the host registers its code executor under.
pub const CODE_EXECUTOR: &str = "codeExecutor";

/// Channel-level method: handshake request, answered with the object registry.
pub const METHOD_CHANNEL_INIT: &str = "channel_init";
/// Channel-level method: invoke a method on a registered object.
pub const METHOD_INVOKE: &str = "invoke";
/// Channel-level method: a signal emitted by a registered object.
pub const METHOD_SIGNAL: &str = "signal";

// Signal names emitted by the host's file-system handler and code executor.
pub const SIGNAL_FILE_CREATED: &str = "fileCreated";
pub const SIGNAL_DIRECTORY_CREATED: &str = "directoryCreated";
pub const SIGNAL_FILE_CHANGED: &str = "fileChanged";
pub const SIGNAL_FILE_DELETED: &str = "fileDeleted";
pub const SIGNAL_DIRECTORY_DELETED: &str = "directoryDeleted";
pub const SIGNAL_FILE_READ: &str = "fileRead";
pub const SIGNAL_ERROR_OCCURRED: &str = "errorOccurred";
pub const SIGNAL_CODE_RESULT_READY: &str = "codeResultReady";

/// Known remote object methods
pub enum RemoteMethod {
    // File-system handler
    CreateFile,        // createFile
    CreateDirectory,   // createDirectory
    ChangeFileContent, // changeFileContent
    DeleteFile,        // deleteFile
    DeleteDirectory,   // deleteDirectory
    ReadFile,          // readFile

    // Code executor
    ExecuteSignal, // executeSignal

    Unknown(String),
}

impl From<&str> for RemoteMethod {
    fn from(s: &str) -> Self {
        match s {
            "createFile" => Self::CreateFile,
            "createDirectory" => Self::CreateDirectory,
            "changeFileContent" => Self::ChangeFileContent,
            "deleteFile" => Self::DeleteFile,
            "deleteDirectory" => Self::DeleteDirectory,
            "readFile" => Self::ReadFile,
            "executeSignal" => Self::ExecuteSignal,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CreateFile => "createFile",
            Self::CreateDirectory => "createDirectory",
            Self::ChangeFileContent => "changeFileContent",
            Self::DeleteFile => "deleteFile",
            Self::DeleteDirectory => "deleteDirectory",
            Self::ReadFile => "readFile",
            Self::ExecuteSignal => "executeSignal",
            Self::Unknown(s) => s,
        };
        write!(f, "{s}")
    }
}
