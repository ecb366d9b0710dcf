mod clean_abandoned_registrations;

pub use clean_abandoned_registrations::CleanAbandonedRegistrationsUseCase;
