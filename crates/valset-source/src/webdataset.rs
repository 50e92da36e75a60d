/*!
Streaming reader for webdataset tar archives.

Archive members are grouped by key: the member path up to the first `.`
of its file name. Consecutive members sharing a key form one sample, and
the rest of the file name, lowercased, names the member. The archive is
consumed strictly in order, so a sample is complete as soon as a member
with a different key shows up.

`tar` only hands out entries borrowed from the archive, so the archive is
walked on a reader thread which passes each sample over a rendezvous
channel. The reader never gets more than one sample ahead of the
consumer and stops as soon as the consumer goes away.
 */

use anyhow::{Context, Result};
use std::{
    io::Read,
    path::Path,
    sync::mpsc::{sync_channel, Receiver, SyncSender},
    thread,
};
use valset_core::source::{ItemStream, Sample, SourceItem};

use crate::fetch::Body;

const MAX_PREALLOCATION: u64 = 1 << 24;

/// Split an archive path into its sample key and member name.
pub(crate) fn split_member(path: &Path) -> Option<(String, String)> {
    let file_name = path.file_name()?.to_str()?;
    let (stem, extension) = match file_name.find('.') {
        Some(idx) => (&file_name[..idx], &file_name[idx + 1..]),
        None => (file_name, ""),
    };

    let key = match path.parent().and_then(Path::to_str) {
        Some(parent) if !parent.is_empty() => format!("{}/{}", parent, stem),
        _ => stem.to_owned(),
    };

    Some((key, extension.to_lowercase()))
}

/// Walk the archive, sending complete samples. Returns once the archive
/// ends or the receiver hangs up.
fn read_samples<R: Read>(reader: R, tx: &SyncSender<Result<SourceItem>>) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    let mut current: Option<Sample> = None;

    for entry in archive.entries().context("failed to read tar archive")? {
        let mut entry = entry.context("failed to read tar entry")?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry.path().context("invalid tar entry path")?.into_owned();
        let (key, member) = match split_member(&path) {
            Some(parts) => parts,
            None => {
                log::warn!("skipping tar member with unreadable name {:?}", path);
                continue;
            }
        };

        // The header size is untrusted until the data is actually there.
        let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        entry
            .read_to_end(&mut data)
            .with_context(|| format!("failed to read tar member {:?}", path))?;

        if current.as_ref().map_or(false, |sample| sample.key != key) {
            if let Some(done) = current.take() {
                if tx.send(Ok(SourceItem::Sample(done))).is_err() {
                    return Ok(());
                }
            }
        }

        current
            .get_or_insert_with(|| Sample::new(key))
            .members
            .insert(member, data);
    }

    if let Some(done) = current {
        let _ = tx.send(Ok(SourceItem::Sample(done)));
    }

    Ok(())
}

/// Stream the samples of the archive behind `body`.
pub(crate) fn stream(body: Body, location: &str) -> Result<ItemStream> {
    let (tx, rx): (_, Receiver<Result<SourceItem>>) = sync_channel(0);
    let location = location.to_owned();

    thread::Builder::new()
        .name("webdataset-reader".to_owned())
        .spawn(move || {
            if let Err(e) = read_samples(body, &tx) {
                let _ = tx.send(Err(e.context(format!("while streaming {}", location))));
            }
        })
        .context("failed to spawn archive reader")?;

    Ok(Box::new(rx.into_iter()))
}
