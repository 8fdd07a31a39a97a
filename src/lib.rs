pub mod error;
pub mod seed;
pub mod db {
    pub mod models;
    pub mod repository;
}
pub mod models {
    pub mod search;
}
pub mod search {
    pub mod history;
    pub mod matcher;
    pub mod service;
}
pub mod scripts {
    pub mod mdm;
    pub mod network;
    pub mod runner;
    pub mod storage;
}
pub mod api {
    pub mod dashboard;
    pub mod errors;
    pub mod feedback;
    pub mod knowledge_base;
    pub mod scripts;
    pub mod search;
}

#[cfg(feature = "server")]
pub mod app;
#[cfg(feature = "server")]
pub mod config;
