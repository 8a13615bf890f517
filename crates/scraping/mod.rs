pub mod job_scraper;
