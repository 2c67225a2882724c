// Adapters layer: one wrapper per third-party API.

pub mod amadeus;
pub mod notification;
pub mod sheety;
pub mod smtp;
pub mod twilio;

pub use amadeus::AmadeusClient;
pub use notification::NotificationManager;
pub use sheety::SheetyClient;
pub use smtp::SmtpMailer;
pub use twilio::TwilioClient;
