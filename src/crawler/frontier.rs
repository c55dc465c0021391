//! FIFO frontier of pages waiting to be crawled
//!
//! URLs are keyed by their page identity (fragment removed). A URL is never
//! queued twice, and once visited or skipped it is never queued again.

use crate::url::page_identity;
use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    visited_order: Vec<Url>,
    skipped: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn new(seed: &Url) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(seed.clone());
        frontier
    }

    /// Adds a URL to the back of the queue
    ///
    /// Returns false if the URL is already queued, visited or skipped.
    pub fn enqueue(&mut self, url: Url) -> bool {
        let url = page_identity(&url);
        let key = url.as_str();
        if self.queued.contains(key) || self.visited.contains(key) || self.skipped.contains(key) {
            return false;
        }
        self.queued.insert(key.to_string());
        self.queue.push_back(url);
        true
    }

    /// Takes the next URL in discovery order
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.queued.remove(url.as_str());
        Some(url)
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(page_identity(url).as_str())
    }

    /// Marks a URL as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        let url = page_identity(url);
        if !self.visited.insert(url.to_string()) {
            return false;
        }
        self.visited_order.push(url);
        true
    }

    /// Marks a URL as rejected by the validity pre-check
    pub fn mark_skipped(&mut self, url: &Url) {
        self.skipped.insert(page_identity(url).to_string());
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Visited URLs in the order they were visited
    pub fn visited(&self) -> &[Url] {
        &self.visited_order
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
