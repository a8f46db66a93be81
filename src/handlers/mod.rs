// handlers/mod.rs - route handlers by domain
//
// Handlers receive a RequestContext prepared by the pipeline: the validated
// payload for POST/PUT/PATCH and the subject for protected routes. They return
// plain JSON or bare text; the pipeline normalizes both.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
