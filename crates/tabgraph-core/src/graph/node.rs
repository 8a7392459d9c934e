use super::constraint::{Constraint, MeasureTaxonomy, SupertypeConstraint};
use super::term::{LiteralValue, NamedRef, NodeId, Term};
use crate::table::CellId;

/// Scan direction used by self-filling nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    LeftToRight,
    RightToLeft,
}

/// Observable state of a feature node. A node is interpreter-typed while it
/// carries a scan direction and unresolved relations remain; the transition
/// to `Value` is one-directional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureState {
    Value,
    Interpreter,
}

/// How a composite node is identified at emission time.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Anonymous,
    Named { name: String, namespace: String },
}

/// A resolved relation: predicate plus fully determined object.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub predicate: NamedRef,
    pub object: Term,
}

/// An unresolved relation: predicate plus a constraint awaiting a filler.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending {
    pub predicate: NamedRef,
    pub constraint: Constraint,
}

/// Relation lists of a composite node. Resolved and unresolved entries
/// reference disjoint slots; filling moves a slot from one list to the other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composite {
    pub identity: Identity,
    pub resolved: Vec<Relation>,
    pub unresolved: Vec<Pending>,
}

impl Default for Identity {
    fn default() -> Self {
        Self::Anonymous
    }
}

/// Closed union over the kinds of graph nodes the classifiers produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Literal(LiteralValue),
    Concept {
        concept: NamedRef,
        parents: Vec<NamedRef>,
    },
    Composite(Composite),
}

/// One feature node: a payload plus the capabilities every feature carries:
/// the originating cell, the tokens it matches, the monotonic subsumption
/// flag, and (for self-filling nodes) a scan direction.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub payload: Payload,
    pub cell: CellId,
    pub matching: Vec<String>,
    pub subsumed: bool,
    pub scan: Option<ScanDirection>,
}

/// Arena owning every feature node produced while one table is interpreted.
#[derive(Debug, Clone)]
pub struct NodePool {
    nodes: Vec<GraphNode>,
    taxonomy: MeasureTaxonomy,
}

impl NodePool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_taxonomy(MeasureTaxonomy::default())
    }

    #[must_use]
    pub fn with_taxonomy(taxonomy: MeasureTaxonomy) -> Self {
        Self {
            nodes: Vec::new(),
            taxonomy,
        }
    }

    pub fn alloc(&mut self, node: GraphNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn new_literal(
        &mut self,
        cell: CellId,
        matching: Vec<String>,
        value: LiteralValue,
    ) -> NodeId {
        self.alloc(GraphNode {
            payload: Payload::Literal(value),
            cell,
            matching,
            subsumed: false,
            scan: None,
        })
    }

    pub fn new_concept(
        &mut self,
        cell: CellId,
        matching: Vec<String>,
        concept: NamedRef,
        parents: Vec<NamedRef>,
    ) -> NodeId {
        self.alloc(GraphNode {
            payload: Payload::Concept { concept, parents },
            cell,
            matching,
            subsumed: false,
            scan: None,
        })
    }

    pub fn new_composite(
        &mut self,
        cell: CellId,
        matching: Vec<String>,
        identity: Identity,
    ) -> NodeId {
        self.alloc(GraphNode {
            payload: Payload::Composite(Composite {
                identity,
                resolved: Vec::new(),
                unresolved: Vec::new(),
            }),
            cell,
            matching,
            subsumed: false,
            scan: None,
        })
    }

    pub fn new_scanning(
        &mut self,
        cell: CellId,
        matching: Vec<String>,
        direction: ScanDirection,
    ) -> NodeId {
        let id = self.new_composite(cell, matching, Identity::Anonymous);
        self.nodes[id.0].scan = Some(direction);
        id
    }

    #[must_use]
    pub fn composite(&self, id: NodeId) -> Option<&Composite> {
        match &self.nodes[id.0].payload {
            Payload::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn composite_mut(&mut self, id: NodeId) -> Option<&mut Composite> {
        match &mut self.nodes[id.0].payload {
            Payload::Composite(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn state(&self, id: NodeId) -> FeatureState {
        let node = &self.nodes[id.0];
        match (&node.payload, node.scan) {
            (Payload::Composite(c), Some(_)) if !c.unresolved.is_empty() => {
                FeatureState::Interpreter
            }
            _ => FeatureState::Value,
        }
    }

    #[must_use]
    pub fn pending_count(&self, id: NodeId) -> usize {
        self.composite(id).map_or(0, |c| c.unresolved.len())
    }

    /// Append a resolved relation.
    pub fn resolve(&mut self, id: NodeId, predicate: NamedRef, object: Term) {
        if let Some(c) = self.composite_mut(id) {
            c.resolved.push(Relation { predicate, object });
        }
    }

    /// Append an unresolved relation awaiting a filler.
    pub fn push_pending(&mut self, id: NodeId, predicate: NamedRef, constraint: Constraint) {
        if let Some(c) = self.composite_mut(id) {
            c.unresolved.push(Pending {
                predicate,
                constraint,
            });
        }
    }

    /// The type a composite node declares, if any: the first resolved
    /// relation whose predicate names a type, falling back to the last
    /// unresolved one (where a supertype constraint's target counts).
    #[must_use]
    pub fn declared_type(&self, id: NodeId) -> Option<NamedRef> {
        let c = self.composite(id)?;
        for rel in &c.resolved {
            if rel.predicate.id.to_ascii_lowercase().contains("type") {
                return match &rel.object {
                    Term::Named(r) => Some(r.clone()),
                    Term::Node(n) => match &self.nodes[n.0].payload {
                        Payload::Concept { concept, .. } => Some(concept.clone()),
                        _ => None,
                    },
                    Term::Literal(_) => None,
                };
            }
        }
        let mut found = None;
        for pending in &c.unresolved {
            if pending.predicate.id.to_ascii_lowercase().contains("type") {
                found = match &pending.constraint {
                    Constraint::Supertype(st) => Some(st.target.clone()),
                    _ => None,
                };
            }
        }
        found
    }

    /// True when the constraint's target is the candidate's declared type or
    /// a declared supertype of it.
    #[must_use]
    pub fn is_supertype_of(&self, constraint: &SupertypeConstraint, candidate: NodeId) -> bool {
        if self.composite(candidate).is_none() || !constraint.node_fillable {
            return false;
        }
        let Some(sub) = self.declared_type(candidate) else {
            return false;
        };
        sub.id == constraint.target.id || self.taxonomy.is_subtype(&sub, &constraint.target)
    }

    /// Whether a candidate meets a constraint. Never mutates.
    #[must_use]
    pub fn satisfies(&self, candidate: NodeId, constraint: &Constraint) -> bool {
        match (&self.nodes[candidate.0].payload, constraint) {
            (Payload::Literal(_), Constraint::Literal)
            | (Payload::Concept { .. }, Constraint::Named) => true,
            (Payload::Composite(_), Constraint::Supertype(st)) => {
                self.is_supertype_of(st, candidate)
            }
            _ => false,
        }
    }

    /// Test whether `candidate` could fill the unresolved relation at
    /// `index` without mutating anything.
    #[must_use]
    pub fn can_fill(&self, id: NodeId, candidate: NodeId, index: usize) -> bool {
        self.composite(id)
            .and_then(|c| c.unresolved.get(index))
            .is_some_and(|p| self.satisfies(candidate, &p.constraint))
    }

    /// Fill the unresolved relation at `index` with `candidate`: the slot
    /// moves to the resolved list, the candidate's matched tokens are
    /// unioned into this node's, and the candidate is marked subsumed.
    /// Returns false (no mutation) when the constraint is not met or the
    /// index no longer names an unresolved slot.
    pub fn try_fill(&mut self, id: NodeId, candidate: NodeId, index: usize) -> bool {
        if !self.can_fill(id, candidate, index) {
            return false;
        }
        let candidate_matching = self.nodes[candidate.0].matching.clone();
        self.nodes[candidate.0].subsumed = true;

        let Some(c) = self.composite_mut(id) else {
            return false;
        };
        let pending = c.unresolved.remove(index);
        c.resolved.push(Relation {
            predicate: pending.predicate,
            object: Term::Node(candidate),
        });
        self.nodes[id.0].matching.extend(candidate_matching);
        true
    }

    /// Shallow copy bound to a new cell: relation lists are copied, objects
    /// are shared, the copy starts unsubsumed and loses the scan capability.
    pub fn duplicate(&mut self, id: NodeId, cell: CellId) -> NodeId {
        let source = &self.nodes[id.0];
        let node = GraphNode {
            payload: source.payload.clone(),
            cell,
            matching: source.matching.clone(),
            subsumed: false,
            scan: None,
        };
        self.alloc(node)
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}
