pub mod header;
pub mod metadata;
pub mod produce;

use crate::protocol::api_key::ApiKey;

/// A request type's wire identity: which API key it is framed under and
/// what response type answers it. [`crate::connection::BrokerConnection`]
/// uses this to pick the right decoder once the response header's
/// correlation id has been matched.
pub trait RequestBody {
    type ResponseBody;

    const API_KEY: ApiKey;
}

impl RequestBody for produce::ProduceRequest {
    type ResponseBody = produce::ProduceResponse;

    const API_KEY: ApiKey = ApiKey::Produce;
}

impl RequestBody for metadata::MetadataRequest {
    type ResponseBody = metadata::MetadataResponse;

    const API_KEY: ApiKey = ApiKey::Metadata;
}
