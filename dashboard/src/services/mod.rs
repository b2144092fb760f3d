pub mod spark_analyzer;
