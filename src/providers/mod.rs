mod bitbucket;
mod http;
mod sonarqube;

pub use bitbucket::BitbucketClient;
pub use sonarqube::SonarQubeClient;
