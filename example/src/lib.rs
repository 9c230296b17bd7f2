//! Consumer side of the bundled demo corpus: hand-written prost types for
//! `proto/demo/license/v1/tx.proto` next to the encoders and builders
//! `build.rs` generates for it.

pub mod proto {
    pub mod google {
        pub mod protobuf {
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct Duration {
                #[prost(int64, tag = "1")]
                pub seconds: i64,
                #[prost(int32, tag = "2")]
                pub nanos:   i32,
            }
        }
    }

    pub mod demo {
        pub mod license {
            pub mod v1 {
                use crate::proto::google::protobuf::Duration;

                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct MsgDelegate {
                    #[prost(string, tag = "1")]
                    pub owner:       String,
                    #[prost(string, tag = "2")]
                    pub operator:    String,
                    #[prost(uint64, repeated, tag = "3")]
                    pub license_ids: Vec<u64>,
                    #[prost(message, optional, tag = "4")]
                    pub window:      Option<Window>,
                }

                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Window {
                    #[prost(message, optional, tag = "1")]
                    pub period:    Option<Duration>,
                    #[prost(bool, tag = "2")]
                    pub renewable: bool,
                }

                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct MsgRevoke {
                    #[prost(string, tag = "1")]
                    pub owner:    String,
                    #[prost(string, tag = "2")]
                    pub operator: String,
                }
            }
        }
    }
}

pub mod encoders {
    include!(concat!(env!("OUT_DIR"), "/protosign/encoders.rs"));
}

pub mod builders {
    include!(concat!(env!("OUT_DIR"), "/protosign/builders.rs"));
}

/// The generated registry, as written next to the generated Rust.
pub const REGISTRY_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/protosign/registry.json"));
