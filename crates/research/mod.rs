pub mod company_research_client;
