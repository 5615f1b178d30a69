mod persistence;
mod retrieval;
