use anyhow::{Context, bail};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::CHUNK_SIZE;
use crate::http::file::FileBody;
use crate::http::request::Version;
use crate::http::response::StatusCode;

/// Renders the status line and headers, ending with the empty line.
pub fn serialize_head(
    status: StatusCode,
    version: Version,
    headers: &[(&'static str, String)],
) -> Bytes {
    let mut buf = BytesMut::with_capacity(256);

    // Status line
    buf.put_slice(version.as_str().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(status.as_u16().to_string().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(status.reason_phrase().as_bytes());
    buf.put_slice(b"\r\n");

    for (k, v) in headers {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_slice(b"\r\n");
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    buf.freeze()
}

/// Writes all of `buf`, retrying short writes.
pub async fn write_fully<W>(stream: &mut W, buf: &[u8]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < buf.len() {
        let n = stream.write(&buf[written..]).await?;

        if n == 0 {
            bail!("connection closed while writing");
        }

        written += n;
    }

    Ok(())
}

/// Streams the file in `CHUNK_SIZE` pieces, each written fully before the
/// next read, until `body.length` bytes have gone out.
pub async fn send_body<W>(stream: &mut W, body: &mut FileBody) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut remaining = body.length;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let n = body
            .file
            .read(&mut chunk[..want])
            .await
            .context("reading response body")?;

        if n == 0 {
            bail!("file ended with {remaining} bytes still owed");
        }

        write_fully(stream, &chunk[..n]).await?;
        remaining -= n as u64;
    }

    Ok(())
}
