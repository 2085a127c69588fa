pub mod report_config;
