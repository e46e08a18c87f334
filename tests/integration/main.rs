//! Integration tests for Site-Harvester

mod crawl_tests;
