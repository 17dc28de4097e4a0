pub mod domain_settings;
