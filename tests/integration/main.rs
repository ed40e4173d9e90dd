//! Integration harness: drives the whole pipeline against a mock
//! weather source and temporary model directories.

mod mock_source;
mod pipeline;
