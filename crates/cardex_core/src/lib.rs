pub mod domain;
pub mod ports;
pub mod template;
pub mod validate;
pub mod vcard;

pub use domain::{
    Communication, CommunicationKind, Contact, ContactPatch, ContactStatus, Direction,
    MessageTemplate, NewCommunication, NewContact, NewUser, User, UserCredentials, UserPatch,
    VCard,
};
pub use ports::{
    ContactFilter, ContactOrder, ContactStore, EmailAttachment, EmailSender, FileStore,
    PortError, PortResult, SendOutcome, SmsSender, UserStore,
};
pub use validate::{SubmissionInput, ValidatedSubmission, ValidationError};
