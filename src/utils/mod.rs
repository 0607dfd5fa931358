pub mod event_feed;
