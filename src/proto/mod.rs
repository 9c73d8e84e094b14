// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Protocol-buffer messages exchanged with predictive-unit backends over gRPC.
//!
//! The messages are declared with `prost` derives so the crate builds without
//! a `protoc` step. Field tags match `unit.v1` on the wire.

pub mod unit_v1 {
    /// Generic request/response message for a single unit call.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PredictionMessage {
        #[prost(message, optional, tag = "1")]
        pub meta: ::core::option::Option<Meta>,
        #[prost(bytes = "vec", tag = "2")]
        pub bin_data: ::prost::alloc::vec::Vec<u8>,
        #[prost(string, tag = "3")]
        pub str_data: ::prost::alloc::string::String,
        #[prost(string, tag = "4")]
        pub json_data: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "5")]
        pub status: ::core::option::Option<Status>,
    }

    /// Ordered list of child results sent to a combiner.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PredictionMessageList {
        #[prost(message, repeated, tag = "1")]
        pub messages: ::prost::alloc::vec::Vec<PredictionMessage>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Meta {
        #[prost(string, tag = "1")]
        pub puid: ::prost::alloc::string::String,
        #[prost(map = "string, string", tag = "2")]
        pub tags: ::std::collections::HashMap<
            ::prost::alloc::string::String,
            ::prost::alloc::string::String,
        >,
        #[prost(map = "string, int32", tag = "3")]
        pub routing: ::std::collections::HashMap<::prost::alloc::string::String, i32>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Status {
        #[prost(int32, tag = "1")]
        pub code: i32,
        #[prost(string, tag = "2")]
        pub info: ::prost::alloc::string::String,
        #[prost(string, tag = "3")]
        pub reason: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MetadataRequest {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TensorMetadata {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub datatype: ::prost::alloc::string::String,
        #[prost(int64, repeated, tag = "3")]
        pub shape: ::prost::alloc::vec::Vec<i64>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UnitMetadataResponse {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(string, repeated, tag = "2")]
        pub versions: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, tag = "3")]
        pub platform: ::prost::alloc::string::String,
        #[prost(message, repeated, tag = "4")]
        pub inputs: ::prost::alloc::vec::Vec<TensorMetadata>,
        #[prost(message, repeated, tag = "5")]
        pub outputs: ::prost::alloc::vec::Vec<TensorMetadata>,
    }
}

pub use unit_v1::{PredictionMessage, PredictionMessageList};
