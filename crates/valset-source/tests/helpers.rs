#![allow(dead_code)]

use serde_json::{json, Value};

/// A tar archive holding `(path, data)` members in order.
pub fn archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(vec![]);
    for (path, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn squad_document(paragraphs: &[(&str, Vec<&str>)]) -> Vec<u8> {
    let paragraphs: Vec<Value> = paragraphs
        .iter()
        .map(|(context, questions)| {
            json!({
                "context": context,
                "qas": questions
                    .iter()
                    .enumerate()
                    .map(|(id, q)| json!({"id": id.to_string(), "question": q, "answers": []}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::to_vec(&json!({
        "version": "1.1",
        "data": [{"title": "synthetic", "paragraphs": paragraphs}],
    }))
    .unwrap()
}

pub fn rows_page(rows: &[(&str, &str)], total: usize) -> Vec<u8> {
    let rows: Vec<Value> = rows
        .iter()
        .enumerate()
        .map(|(idx, (question, context))| {
            json!({
                "row_idx": idx,
                "row": {"id": idx.to_string(), "title": "t", "question": question, "context": context},
                "truncated_cells": [],
            })
        })
        .collect();

    serde_json::to_vec(&json!({"rows": rows, "num_rows_total": total, "partial": false})).unwrap()
}
