//! Generates the `quote.Quote` gRPC service stubs.
//!
//! The messages are hand-written prost types in `src/rpc/proto.rs`, so the
//! service is described with the manual builder and no `protoc` is needed.

fn main() {
    let get_quote = tonic_build::manual::Method::builder()
        .name("get_quote")
        .route_name("GetQuote")
        .input_type("crate::rpc::proto::GetQuoteRequest")
        .output_type("crate::rpc::proto::GetQuoteResponse")
        .codec_path("tonic::codec::ProstCodec")
        .build();

    let service = tonic_build::manual::Service::builder()
        .name("Quote")
        .package("quote")
        .method(get_quote)
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
