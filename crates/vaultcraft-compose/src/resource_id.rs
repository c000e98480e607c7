//! Parsing of resource identifiers and network rules using `nom`.
//!
//! Resource identifiers follow the management API layout:
//!
//! ```text
//! /subscriptions/<sub>/resourceGroups/<rg>[/providers/<namespace>/<type>/<name>[/<type>/<name>]*]
//! ```
//!
//! IP rules are IPv4 addresses or IPv4 CIDR blocks.

use nom::{
    IResult, Parser,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    multi::many0,
    sequence::preceded,
};

/// A parsed resource identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    /// Subscription identifier.
    pub subscription: String,
    /// Resource group name.
    pub resource_group: String,
    /// Provider namespace (`Microsoft.Network`, ...); `None` at group scope.
    pub namespace: Option<String>,
    /// Type/name pairs below the namespace, outermost first.
    pub segments: Vec<(String, String)>,
}

impl ResourceId {
    /// Returns `true` if the identifier addresses a resource group itself.
    #[must_use]
    pub const fn is_resource_group(&self) -> bool {
        self.namespace.is_none()
    }

    /// Full resource type, e.g. `Microsoft.Network/virtualNetworks/subnets`.
    #[must_use]
    pub fn resource_type(&self) -> Option<String> {
        let namespace = self.namespace.as_ref()?;
        let types: Vec<&str> = self.segments.iter().map(|(t, _)| t.as_str()).collect();
        Some(format!("{namespace}/{}", types.join("/")))
    }
}

/// A parsed IP rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRule {
    /// Address octets.
    pub octets: [u8; 4],
    /// Prefix length; `None` for a single address.
    pub prefix: Option<u8>,
}

const fn is_segment_char(c: char) -> bool {
    c != '/' && !c.is_whitespace()
}

fn segment(input: &str) -> IResult<&str, &str> {
    preceded(char('/'), take_while1(is_segment_char)).parse(input)
}

fn type_name_pair(input: &str) -> IResult<&str, (String, String)> {
    let (input, (kind, name)) = (segment, segment).parse(input)?;
    Ok((input, (kind.to_owned(), name.to_owned())))
}

fn provider_tail(input: &str) -> IResult<&str, (String, Vec<(String, String)>)> {
    let (input, _) = tag_no_case("/providers").parse(input)?;
    let (input, namespace) = segment(input)?;
    let (input, first) = type_name_pair(input)?;
    let (input, mut rest) = many0(type_name_pair).parse(input)?;
    rest.insert(0, first);
    Ok((input, (namespace.to_owned(), rest)))
}

fn resource_id(input: &str) -> IResult<&str, ResourceId> {
    let (input, _) = tag_no_case("/subscriptions").parse(input)?;
    let (input, subscription) = segment(input)?;
    let (input, _) = tag_no_case("/resourceGroups").parse(input)?;
    let (input, resource_group) = segment(input)?;
    let (input, tail) = opt(provider_tail).parse(input)?;
    let (namespace, segments) = tail.map_or((None, Vec::new()), |(ns, segs)| (Some(ns), segs));
    Ok((
        input,
        ResourceId {
            subscription: subscription.to_owned(),
            resource_group: resource_group.to_owned(),
            namespace,
            segments,
        },
    ))
}

fn octet(input: &str) -> IResult<&str, u8> {
    map_res(digit1, str::parse::<u8>).parse(input)
}

fn ipv4(input: &str) -> IResult<&str, [u8; 4]> {
    let (input, (a, _, b, _, c, _, d)) =
        (octet, char('.'), octet, char('.'), octet, char('.'), octet).parse(input)?;
    Ok((input, [a, b, c, d]))
}

fn prefix_len(input: &str) -> IResult<&str, u8> {
    map_res(digit1, |digits: &str| {
        digits
            .parse::<u8>()
            .map_err(|_| ())
            .and_then(|p| if p <= 32 { Ok(p) } else { Err(()) })
    })
    .parse(input)
}

fn ip_rule(input: &str) -> IResult<&str, IpRule> {
    let (input, octets) = ipv4(input)?;
    let (input, prefix) = opt(preceded(tag("/"), prefix_len)).parse(input)?;
    Ok((input, IpRule { octets, prefix }))
}

/// Parses a full resource identifier.
///
/// Returns `None` if the input is not a well-formed identifier.
#[must_use]
pub fn parse_resource_id(input: &str) -> Option<ResourceId> {
    all_consuming(resource_id)
        .parse(input.trim_end_matches('/'))
        .ok()
        .map(|(_, id)| id)
}

/// Parses an IPv4 address or CIDR block.
///
/// Returns `None` for anything else, including prefixes above 32.
#[must_use]
pub fn parse_ip_rule(input: &str) -> Option<IpRule> {
    all_consuming(ip_rule).parse(input).ok().map(|(_, rule)| rule)
}
