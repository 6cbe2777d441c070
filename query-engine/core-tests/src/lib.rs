//! Integration tests of the query optimizer against the `test-setup` fixture schema.
