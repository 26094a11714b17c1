use crate::types::{LinkInfo, LinkTarget, Rect};

/// Maps an internal link's destination rectangle into the top-left-origin
/// space that link hot spots and search hits use. `page_height` is the height
/// of the destination page, not of the page carrying the link.
///
/// The factor of two is empirical.
pub fn flip_target(target: &mut Rect, page_height: f32) {
    target.left *= 2.0;
    target.top = page_height - 2.0 * target.top;
    target.right *= 2.0;
    target.bottom = page_height - 2.0 * target.bottom;
}

/// Applies [`flip_target`] to every internal link, looking up destination page
/// heights through `page_height`. External and remote links are left alone.
pub fn normalize_links<F, E>(links: &mut [LinkInfo], mut page_height: F) -> Result<(), E>
where
    F: FnMut(usize) -> Result<f32, E>,
{
    for link in links {
        if let LinkTarget::Internal { page, target } = &mut link.target {
            let height = page_height(*page)?;
            flip_target(target, height);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_target_is_doubled_and_flipped() {
        let mut links = vec![LinkInfo {
            rect: Rect::new(10.0, 10.0, 20.0, 20.0),
            target: LinkTarget::Internal {
                page: 3,
                target: Rect::new(1.0, 2.0, 3.0, 4.0),
            },
        }];

        let mut asked = Vec::new();
        normalize_links(&mut links, |page| {
            asked.push(page);
            Ok::<_, ()>(100.0)
        })
        .unwrap();

        assert_eq!(asked, vec![3]);
        assert_eq!(
            links[0].target,
            LinkTarget::Internal {
                page: 3,
                target: Rect::new(2.0, 96.0, 6.0, 92.0),
            }
        );
        assert_eq!(links[0].rect, Rect::new(10.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn external_and_remote_links_pass_through() {
        let original = vec![
            LinkInfo {
                rect: Rect::new(0.0, 0.0, 5.0, 5.0),
                target: LinkTarget::External {
                    uri: "https://example.org".into(),
                },
            },
            LinkInfo {
                rect: Rect::new(5.0, 5.0, 9.0, 9.0),
                target: LinkTarget::Remote {
                    file: "other.pdf".into(),
                    page: Some(2),
                    new_window: false,
                },
            },
        ];
        let mut links = original.clone();
        normalize_links(&mut links, |_| -> Result<f32, ()> {
            panic!("no page lookup expected")
        })
        .unwrap();
        assert_eq!(links, original);
    }
}
