//! Mock-server tests for the service clients

pub mod ollama_mock_tests;
