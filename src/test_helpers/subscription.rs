use crate::models::{Frequency, Subscription};

/// A builder for creating `Subscription` instances for testing.
pub struct SubscriptionBuilder {
    email: String,
    permits: Vec<String>,
    frequency: Frequency,
}

impl SubscriptionBuilder {
    /// Creates a builder for `email` with no permits.
    pub fn new(email: &str) -> Self {
        Self { email: email.to_string(), permits: Vec::new(), frequency: Frequency::Daily }
    }

    /// Adds a monitored permit.
    pub fn permit(mut self, permit: &str) -> Self {
        self.permits.push(permit.to_string());
        self
    }

    /// Sets the delivery frequency.
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Builds the subscription.
    pub fn build(self) -> Subscription {
        Subscription::new(self.email, self.permits, self.frequency)
    }
}
