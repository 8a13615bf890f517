pub mod enrichment_queue;
