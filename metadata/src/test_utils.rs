//! Hand assembled metadata blobs, shared by the unit tests.

use crate::decode::DecodeMetadata;
use crate::registry::PortableRegistry;
use parity_scale_codec::{Compact, Encode};

pub type FieldSpec<'a> = (Option<&'a str>, u32, Option<&'a str>);

pub fn compact(n: u32) -> Vec<u8> {
    Compact(n).encode()
}

pub fn strings(list: &[&str]) -> Vec<u8> {
    list.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .encode()
}

fn opt_string(s: Option<&str>) -> Vec<u8> {
    s.map(|s| s.to_string()).encode()
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

fn list_of<T, F: Fn(&T) -> Vec<u8>>(items: &[T], encode: F) -> Vec<u8> {
    let mut raw = compact(items.len() as u32);
    for item in items {
        raw.extend(encode(item));
    }
    raw
}

/// An encoded `Type` without type parameters or docs.
pub fn type_with(path: &[&str], type_def: Vec<u8>) -> Vec<u8> {
    concat(&[&strings(path), &compact(0), &type_def, &strings(&[])])
}

pub fn field(name: Option<&str>, ty: u32, type_name: Option<&str>) -> Vec<u8> {
    concat(&[&opt_string(name), &compact(ty), &opt_string(type_name), &strings(&[])])
}

fn fields(specs: &[FieldSpec]) -> Vec<u8> {
    list_of(specs, |&(name, ty, type_name)| field(name, ty, type_name))
}

pub fn composite(path: &[&str], specs: &[FieldSpec]) -> Vec<u8> {
    type_with(path, concat(&[&[0], &fields(specs)]))
}

pub fn variant(path: &[&str], arms: &[(&str, u8, &[FieldSpec])]) -> Vec<u8> {
    let arms = list_of(arms, |&(name, index, specs)| {
        concat(&[&name.encode(), &fields(specs), &[index], &strings(&[])])
    });

    type_with(path, concat(&[&[1], &arms]))
}

pub fn sequence(ty: u32) -> Vec<u8> {
    type_with(&[], concat(&[&[2], &compact(ty)]))
}

pub fn array(len: u32, ty: u32) -> Vec<u8> {
    type_with(&[], concat(&[&[3], &len.encode(), &compact(ty)]))
}

pub fn tuple(ids: &[u32]) -> Vec<u8> {
    type_with(&[], concat(&[&[4], &list_of(ids, |&id| compact(id))]))
}

pub fn primitive(tag: u8) -> Vec<u8> {
    type_with(&[], vec![5, tag])
}

pub fn compact_of(ty: u32) -> Vec<u8> {
    type_with(&[], concat(&[&[6], &compact(ty)]))
}

pub fn bit_sequence(store: u32, order: u32) -> Vec<u8> {
    type_with(&[], concat(&[&[7], &compact(store), &compact(order)]))
}

pub fn historic(name: &str) -> Vec<u8> {
    type_with(&[], concat(&[&[8], &name.encode()]))
}

/// Encode a registry from `(id, encoded type)` pairs, in the given order.
pub fn encode_registry(types: &[(u32, Vec<u8>)]) -> Vec<u8> {
    list_of(types, |(id, ty)| concat(&[&compact(*id), ty]))
}

pub fn decode_registry(raw: &[u8]) -> PortableRegistry {
    let mut input = raw;
    let registry = PortableRegistry::decode_metadata(&mut input).unwrap();
    assert!(input.is_empty(), "trailing registry bytes");
    registry
}

/// A registry covering every type shape, with ids out of order.
pub fn sample_types() -> Vec<u8> {
    let no_fields: &[FieldSpec] = &[];
    let transfer: &[FieldSpec] = &[
        (Some("dest"), 11, Some("")),
        (Some("value"), 13, Some("T::Balance")),
    ];

    encode_registry(&[
        (5, primitive(5)),
        (2, primitive(7)),
        (10, primitive(3)),
        (4, sequence(10)),
        (
            9,
            composite(
                &["sp_arithmetic", "per_things", "Perbill"],
                &[(None, 5, Some("u32"))],
            ),
        ),
        (11, array(32, 10)),
        (12, tuple(&[5, 2])),
        (13, compact_of(2)),
        (15, composite(&["bitvec", "order", "Lsb0"], &[])),
        (14, bit_sequence(10, 15)),
        (18, historic("T::Moment")),
        (
            7,
            variant(
                &["pallet_balances", "pallet", "Call"],
                &[
                    ("transfer", 0, transfer),
                    ("force_transfer", 2, transfer),
                    ("transfer_keep_alive", 3, transfer),
                ],
            ),
        ),
        (
            8,
            variant(
                &["pallet_balances", "pallet", "Event"],
                &[
                    ("Endowed", 0, &[(None, 11, Some("T::AccountId"))]),
                    ("Transfer", 2, &[(None, 11, None), (None, 11, None), (None, 2, None)]),
                ],
            ),
        ),
        (
            3,
            variant(
                &["frame_system", "pallet", "Call"],
                &[("remark", 1, &[(Some("remark"), 4, Some("Vec<u8>"))])],
            ),
        ),
        (
            16,
            variant(
                &["frame_system", "pallet", "Event"],
                &[("ExtrinsicSuccess", 0, no_fields)],
            ),
        ),
        (17, composite(&["broken", "Call"], &[])),
    ])
}

fn storage_entry(name: &str, modifier: u8, shape: Vec<u8>) -> Vec<u8> {
    concat(&[
        &name.encode(),
        &[modifier],
        &shape,
        &Vec::<u8>::new().encode(),
        &strings(&[]),
    ])
}

fn some(raw: Vec<u8>) -> Vec<u8> {
    concat(&[&[1], &raw])
}

const NONE: u8 = 0;

/// Metadata V13 with the modules `System` (0), `Balances` (5) and
/// `Timestamp` (3).
pub fn v13_metadata() -> Vec<u8> {
    let plain = |ty: &str| concat(&[&[0], &ty.encode()]);
    let transfer_args = list_of(
        &[
            ("dest", "<T::Lookup as StaticLookup>::Source"),
            ("value", "Compact<T::Balance>"),
        ],
        |&(name, ty)| concat(&[&name.encode(), &ty.encode()]),
    );
    let function = |name: &str, args: &[u8]| concat(&[&name.encode(), args, &strings(&[])]);
    let event = |name: &str, args: &[&str]| concat(&[&name.encode(), &strings(args), &strings(&[])]);

    let system = concat(&[
        &"System".encode(),
        &some(concat(&[
            &"System".encode(),
            &compact(2),
            &storage_entry("Number", 1, plain("T::BlockNumber")),
            &storage_entry(
                "Account",
                1,
                concat(&[
                    &[1, 2],
                    &"T::AccountId".encode(),
                    &"AccountInfo<T::Index, T::AccountData>".encode(),
                    &false.encode(),
                ]),
            ),
        ])),
        &some(concat(&[
            &compact(2),
            &function("remark", &list_of(&[("_remark", "Vec<u8>")], |&(n, t)| {
                concat(&[&n.encode(), &t.encode()])
            })),
            &function("set_code", &list_of(&[("code", "Vec<u8>")], |&(n, t)| {
                concat(&[&n.encode(), &t.encode()])
            })),
        ])),
        &some(concat(&[
            &compact(2),
            &event("ExtrinsicSuccess", &["DispatchInfo"]),
            &event("ExtrinsicFailed", &["DispatchError", "DispatchInfo"]),
        ])),
        &compact(0),
        &compact(0),
        &[0],
    ]);

    let balances = concat(&[
        &"Balances".encode(),
        &some(concat(&[
            &"Balances".encode(),
            &compact(3),
            &storage_entry("TotalIssuance", 1, plain("T::Balance")),
            &storage_entry(
                "Locks",
                1,
                concat(&[
                    &[2, 2],
                    &"T::AccountId".encode(),
                    &"u32".encode(),
                    &"Vec<BalanceLock<T::Balance>>".encode(),
                    &[5],
                ]),
            ),
            &storage_entry(
                "Reserves",
                0,
                concat(&[
                    &[3],
                    &strings(&["u32", "u64", "u8"]),
                    &compact(3),
                    &[5, 6, 0],
                    &"T::Balance".encode(),
                ]),
            ),
        ])),
        &some(concat(&[
            &compact(2),
            &function("transfer", &transfer_args),
            &function("transfer_keep_alive", &transfer_args),
        ])),
        &some(concat(&[
            &compact(2),
            &event("Endowed", &["AccountId", "Balance"]),
            &event("Transfer", &["AccountId", "AccountId", "Balance"]),
        ])),
        &list_of(&[("ExistentialDeposit", "Balance", 100u128)], |&(name, ty, value)| {
            concat(&[
                &name.encode(),
                &ty.encode(),
                &value.encode().encode(),
                &strings(&[]),
            ])
        }),
        &list_of(&["InsufficientBalance"], |&name| {
            concat(&[&name.encode(), &strings(&[])])
        }),
        &[5],
    ]);

    let timestamp = concat(&[
        &"Timestamp".encode(),
        &[NONE, NONE, NONE],
        &compact(0),
        &compact(0),
        &[3],
    ]);

    concat(&[
        b"meta",
        &[13],
        &compact(3),
        &system,
        &balances,
        &timestamp,
        // Extrinsic version and signed extensions.
        &[4],
        &strings(&["CheckNonce"]),
    ])
}

/// Metadata V14 on top of [`sample_types`], with the pallets `System` (0),
/// `Balances` (10), `Broken` (42) and `Empty` (7).
pub fn v14_metadata() -> Vec<u8> {
    let plain = |ty: u32| concat(&[&[0], &compact(ty)]);
    let map = |hashers: &[u8], key: u32, value: u32| {
        concat(&[
            &[1],
            &compact(hashers.len() as u32),
            hashers,
            &compact(key),
            &compact(value),
        ])
    };
    let constant = |name: &str, ty: u32, value: Vec<u8>| {
        concat(&[&name.encode(), &compact(ty), &value.encode(), &strings(&[])])
    };

    let system = concat(&[
        &"System".encode(),
        &some(concat(&[
            &"System".encode(),
            &compact(2),
            &storage_entry("Account", 1, map(&[2], 11, 12)),
            &storage_entry("Number", 1, plain(5)),
        ])),
        &some(compact(3)),
        &some(compact(16)),
        &compact(0),
        &[NONE],
        &[0],
    ]);

    let balances = concat(&[
        &"Balances".encode(),
        &some(concat(&[
            &"Balances".encode(),
            &compact(3),
            &storage_entry("TotalIssuance", 1, plain(2)),
            &storage_entry("Locks", 1, map(&[2], 11, 4)),
            &storage_entry("Triple", 0, map(&[5, 6, 0], 12, 2)),
        ])),
        &some(compact(7)),
        &some(compact(8)),
        &compact(3),
        &constant("ExistentialDeposit", 2, 500u128.encode()),
        &constant("Fee", 9, 10u32.encode()),
        &constant("Compacted", 13, Compact(5u128).encode()),
        &[NONE],
        &[10],
    ]);

    let broken = concat(&[
        &"Broken".encode(),
        &[NONE],
        &some(compact(17)),
        &some(compact(99)),
        &compact(0),
        &[NONE],
        &[42],
    ]);

    let empty = concat(&[
        &"Empty".encode(),
        &[NONE, NONE, NONE],
        &compact(0),
        &[NONE],
        &[7],
    ]);

    concat(&[
        b"meta",
        &[14],
        &sample_types(),
        &compact(4),
        &system,
        &balances,
        &broken,
        &empty,
        // Extrinsic type, version and signed extensions.
        &compact(12),
        &[4],
        &compact(1),
        &"CheckNonce".encode(),
        &compact(5),
        &compact(12),
        // Runtime type.
        &compact(18),
    ])
}

pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
