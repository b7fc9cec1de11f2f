pub mod submission_dispatcher;

pub use submission_dispatcher::SubmissionDispatcher;
