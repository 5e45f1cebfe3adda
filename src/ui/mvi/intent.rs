/// Marker trait for intents.
///
/// An intent is either something the platform reported (a load finished,
/// a status changed, a sample arrived) or something the user asked for.
pub trait Intent: Send + 'static {}
