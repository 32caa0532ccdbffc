mod client;

pub use client::SonarQubeClient;
