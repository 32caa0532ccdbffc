mod client;

pub use client::BitbucketClient;
