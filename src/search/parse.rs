use log::debug;
use roxmltree::{Document, Node};

use crate::error::ViewerError;
use crate::models::{PhotoResult, ResultSet};

fn photo_from_node(node: &Node) -> Option<PhotoResult> {
    Some(PhotoResult {
        id: node.attribute("id")?.to_owned(),
        title: node.attribute("title")?.to_owned(),
        secret: node.attribute("secret")?.to_owned(),
        server: node.attribute("server")?.to_owned(),
        farm: node.attribute("farm")?.to_owned(),
    })
}

/// Turns a flickr.photos.search response into results. Records without all
/// of id, title, secret, server and farm are skipped instead of failing
pub fn parse_search_response(body: &str) -> Result<ResultSet, ViewerError> {
    let doc = Document::parse(body)?;
    let root = doc.root_element();

    // failed calls still come back as 200 with <rsp stat="fail">
    if root.tag_name().name() == "rsp" && root.attribute("stat") == Some("fail") {
        let err = root.children().find(|n| n.has_tag_name("err"));
        return Err(ViewerError::Service {
            code: err
                .and_then(|n| n.attribute("code"))
                .unwrap_or("unknown")
                .to_owned(),
            message: err
                .and_then(|n| n.attribute("msg"))
                .unwrap_or("no message")
                .to_owned(),
        });
    }

    let mut skipped = 0;
    let photos = doc
        .descendants()
        .filter(|n| n.has_tag_name("photo"))
        .filter_map(|n| {
            let photo = photo_from_node(&n);
            if photo.is_none() {
                skipped += 1;
            }
            photo
        })
        .collect::<Vec<_>>();
    if skipped > 0 {
        debug!("Skipped {} incomplete photo records", skipped);
    }
    Ok(ResultSet(photos))
}
