use std::fmt::{Display, Formatter};

/// Command posted by a user as the whole body of an issue comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeeperCommand {
    /// Acknowledge a request to run the test suite.
    RunAllTests,
    /// Put the pull request into the label queue.
    Queue,
    /// Remove all queue labels from the pull request.
    Unqueue,
    /// List the pull requests currently waiting in the queue.
    QueueStatus,
    /// Make sure all queue labels exist in every configured repository.
    SyncLabels,
}

impl KeeperCommand {
    const ALL: [KeeperCommand; 5] = [
        KeeperCommand::RunAllTests,
        KeeperCommand::Queue,
        KeeperCommand::Unqueue,
        KeeperCommand::QueueStatus,
        KeeperCommand::SyncLabels,
    ];

    /// Comments are matched exactly, after trimming surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeeperCommand::RunAllTests => "run all tests",
            KeeperCommand::Queue => "queue",
            KeeperCommand::Unqueue => "unqueue",
            KeeperCommand::QueueStatus => "queue status",
            KeeperCommand::SyncLabels => "sync labels",
        }
    }

    /// Whether the command has to be issued on a pull request (not a plain issue).
    pub fn needs_pull_request(&self) -> bool {
        matches!(self, KeeperCommand::Queue | KeeperCommand::Unqueue)
    }
}

impl Display for KeeperCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
