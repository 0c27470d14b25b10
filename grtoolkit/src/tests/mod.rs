
// Symbolic engine tests
mod simplification;

// Resolver tests
mod bindings;
mod resolver;
mod report;
