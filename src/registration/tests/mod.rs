//! Unit tests for push provider registration.
