mod crawl_tests;
mod dashboard_tests;
