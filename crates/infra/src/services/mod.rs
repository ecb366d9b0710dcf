mod email;

pub use email::{
    EmailSendError, HttpEmailService, IEmailService, InMemoryEmailService, SentEmail,
};
